mod init;
mod resolve;
mod typeahead;

pub use init::cmd_init;
pub use resolve::cmd_resolve;
pub use typeahead::cmd_typeahead;
