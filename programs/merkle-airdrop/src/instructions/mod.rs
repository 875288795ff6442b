pub use activate_campaign::*;
pub use claim::*;
pub use new_campaign::*;
pub use rotate_root::*;
pub use update_total_reward::*;
pub mod activate_campaign;
pub mod claim;
pub mod new_campaign;
pub mod rotate_root;
pub mod update_total_reward;
