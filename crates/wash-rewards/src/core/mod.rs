pub mod pipeline;
pub mod price_resolver;
pub mod ranking;
pub mod reward_allocator;
pub mod volume_aggregator;
pub mod wash_detector;
