mod persistence;

pub use persistence::PersistenceConfigSection;
