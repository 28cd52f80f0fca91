pub mod forward_state;
pub mod network;
pub mod spec;

pub use forward_state::ForwardState;
pub use network::Network;
pub use spec::NetworkSpec;
