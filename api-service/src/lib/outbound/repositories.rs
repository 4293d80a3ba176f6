pub mod mongo;
pub mod postgres;
pub mod redis;

pub use self::mongo::MongoUserRepository;
pub use self::postgres::PostgresUserRepository;
pub use self::redis::RedisUserRepository;
