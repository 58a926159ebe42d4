/// A monthly subscription price in whole currency units, never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(i32);

impl TryFrom<i32> for Price {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err("Price cannot be negative".into());
        }
        Ok(Self(value))
    }
}

impl From<Price> for i32 {
    fn from(price: Price) -> Self {
        price.0
    }
}
