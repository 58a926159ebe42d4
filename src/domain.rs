mod price;
mod service_name;
mod sub_date;

pub use price::Price;
pub use service_name::ServiceName;
pub use sub_date::SubDate;
