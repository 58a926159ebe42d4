use std::net::TcpListener;

use lazy_static::lazy_static;

use reqwest::{Client, Method, Response, StatusCode};

use serde::Serialize;

use sqlx::PgPool;

use uuid::Uuid;

use subtrack::app;
use subtrack::model::Subscription;
use subtrack::telemetry;

lazy_static! {
    // One subscriber for the whole test binary; set `TEST_LOG` to see output
    static ref TRACING: () = {
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = telemetry::create_subscriber("debug".into(), std::io::stdout);
            telemetry::set_subscriber(subscriber).expect("Failed to set subscriber");
        } else {
            let subscriber = telemetry::create_subscriber("debug".into(), std::io::sink);
            telemetry::set_subscriber(subscriber).expect("Failed to set subscriber");
        }
    };
}

/// Request body for the create endpoint. Every field is optional so tests
/// can drop or override any of them.
#[derive(Debug, Default, Serialize)]
pub struct SubscriptionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl SubscriptionBody {
    /// A fully-valid body owned by the given user
    pub fn valid(user_id: Uuid) -> Self {
        Self {
            id: None,
            service_name: Some("Music Plus".into()),
            price: Some(500),
            user_id: Some(user_id.to_string()),
            start_date: Some("2026-02-01".into()),
            end_date: None,
        }
    }
}

/// Request body for the update endpoint
#[derive(Debug, Default, Serialize)]
pub struct SubscriptionPatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

pub struct TestApp {
    addr: String,

    pub client: Client,
}

impl TestApp {
    pub async fn spawn(pool: &PgPool) -> Self {
        lazy_static::initialize(&TRACING);

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let server = app::run(listener, pool.clone()).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self { addr, client }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health").send().await
    }

    pub async fn subscription_create(&self, body: &SubscriptionBody) -> reqwest::Result<Response> {
        self.request(Method::POST, "subscriptions")
            .json(body)
            .send()
            .await
    }

    pub async fn subscription_get(&self, id: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, &format!("subscriptions/{}", id))
            .send()
            .await
    }

    pub async fn subscription_update(
        &self,
        id: &str,
        body: &SubscriptionPatchBody,
    ) -> reqwest::Result<Response> {
        self.request(Method::PUT, &format!("subscriptions/{}", id))
            .json(body)
            .send()
            .await
    }

    pub async fn subscription_delete(&self, id: &str) -> reqwest::Result<Response> {
        self.request(Method::DELETE, &format!("subscriptions/{}", id))
            .send()
            .await
    }

    pub async fn subscription_list(&self, user_id: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, "subscriptions")
            .query(&[("user_id", user_id)])
            .send()
            .await
    }

    pub async fn subscription_total(&self, params: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.request(Method::GET, "subscriptions/total")
            .query(params)
            .send()
            .await
    }

    /// Create a subscription through the API and decode the stored record
    pub async fn seed_subscription(&self, body: &SubscriptionBody) -> Subscription {
        let res = self
            .subscription_create(body)
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::CREATED, res.status());

        res.json()
            .await
            .expect("Failed to decode created subscription")
    }
}
