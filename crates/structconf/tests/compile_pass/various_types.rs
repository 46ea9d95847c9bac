//! Every supported leaf type next to members that are skipped.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

use structconf::Settable;
use structconf::num_complex::Complex;

#[derive(Settable)]
pub struct Config {
    pub a: bool,
    pub b: i8,
    pub c: i16,
    pub d: i32,
    pub e: i64,
    pub f: isize,
    pub g: u8,
    pub h: u16,
    pub i: u32,
    pub j: u64,
    pub k: usize,
    pub l: f32,
    pub m: f64,
    pub n: Complex<f32>,
    pub o: Complex<f64>,
    pub p: String,
    pub q: Duration,
    pub r: PathBuf,

    pub list: Vec<String>,
    pub map: HashMap<String, String>,
    pub array: [u8; 4],
    pub maybe: Option<u32>,
    pub callback: fn(u32) -> u32,
    pub channel: Sender<u32>,
}

fn main() {}
