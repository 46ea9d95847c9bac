//! Nested, optional and boxed records.

use structconf::{Context, Settable};

#[derive(Settable, Default)]
pub struct Database {
    #[conf("env:DB_HOST,default:localhost")]
    pub host: String,
}

#[derive(Settable, Default)]
pub struct Config {
    pub primary: Database,
    pub replica: Option<Database>,
    pub fallback: Box<Database>,
    pub nested: Option<Box<Database>>,
}

fn main() {
    let mut config = Config::default();
    let _ = structconf::parse(&Context::background(), &mut config);
}
