//! Annotated, skipped and private fields.

use structconf::{Context, Settable};

#[derive(Settable, Default)]
pub struct Config {
    #[conf("env:DATABASE_URL,required")]
    pub database_url: String,

    #[conf("env:PORT,flag:port,default:8080,usage:listen port")]
    pub port: u16,

    pub(crate) debug: bool,

    #[conf(skip)]
    pub computed: u64,

    internal: u8,

    pub r#type: String,
}

fn main() {
    let mut config = Config::default();
    let _ = structconf::parse(&Context::background(), &mut config);
    let _ = config.internal;
}
