pub use process_create_dummy_csv::*;
pub use process_create_merkle_tree::*;
pub use process_get_proof::*;
pub use process_simulate_claim::*;
pub use process_verify_proof::*;
pub mod process_create_dummy_csv;
pub mod process_create_merkle_tree;
pub mod process_get_proof;
pub mod process_simulate_claim;
pub mod process_verify_proof;
