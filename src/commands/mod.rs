pub mod add;
pub mod delete;
pub mod display;
pub mod edit;
pub mod export;
pub mod health;
pub mod list;
pub mod search;
pub mod show;
pub mod tags;
