pub mod campaign;
pub mod events;
pub mod user_reward;
