pub mod health;
pub mod request;
pub mod route;
pub mod stop;

pub use serde_with;

pub trait ExampleData {
    fn example_data() -> Self;
}
