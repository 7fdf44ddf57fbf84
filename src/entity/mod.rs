pub mod snake;

pub use snake::Snake;
