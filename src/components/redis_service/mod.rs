mod actor;

pub use actor::{RedisActor, RedisActorHandle};
