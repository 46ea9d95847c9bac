//! Field discovery.
//!
//! Discovery walks a record depth-first in declaration order and collects
//! one [`Field`] per settable leaf. What counts as a leaf, a nested record,
//! or a skipped member is decided by the member's type through the
//! [`Discover`] trait:
//!
//! | Member type | Outcome |
//! |-------------|---------|
//! | scalars, `String`, `Duration`, complex numbers | leaf |
//! | registered unmarshaler types | leaf with hook |
//! | `#[derive(Settable)]` records, `Box<R>` | recurse |
//! | `Option<R>` of a record | recurse when `Some`, skip when `None` |
//! | collections, arrays, channels, pointers, callables | skip |
//! | `Option` or `Box` of anything skipped above, or of a scalar | skip |
//!
//! A member type with no [`Discover`] impl is rejected at compile time.
//! Members without a visibility modifier are skipped by the derive.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::time::Duration;

use num_complex::Complex;

use crate::{Error, Field};

/// Name and annotation of a record member, as declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    /// The member's identifier.
    pub name: &'static str,

    /// The member's `conf` annotation, if any.
    pub annotation: Option<&'static str>,
}

impl Member {
    /// Creates a member descriptor.
    #[must_use]
    pub const fn new(name: &'static str, annotation: Option<&'static str>) -> Self {
        Self { name, annotation }
    }
}

/// A record whose settable leaves can be enumerated.
///
/// Usually derived with `#[derive(Settable)]`.
pub trait Settable {
    /// Appends this record's settable fields to `fields` in declaration
    /// order, recursing into nested records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if a member cannot be classified.
    fn settable_fields<'a>(&'a mut self, fields: &mut Vec<Field<'a>>) -> Result<(), Error>;
}

/// How a member of a record takes part in discovery.
pub trait Discover {
    /// Appends the fields contributed by this member, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the member cannot be classified.
    fn discover<'a>(&'a mut self, member: Member, fields: &mut Vec<Field<'a>>)
    -> Result<(), Error>;
}

/// Collects the settable fields of `record`.
///
/// Each call produces fresh fields borrowing from `record`.
///
/// # Errors
///
/// Returns [`Error::Discovery`] if a member cannot be classified.
///
/// # Example
///
/// ```rust
/// use structconf::{Settable, settable_fields};
///
/// #[derive(Settable, Default)]
/// pub struct Config {
///     #[conf("env:NAME")]
///     pub name: String,
///     pub port: u16,
///     hidden: u8,
/// }
///
/// let mut config = Config::default();
/// let fields = settable_fields(&mut config).unwrap();
/// let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
/// assert_eq!(names, ["name", "port"]);
/// ```
pub fn settable_fields<T: Settable + ?Sized>(record: &mut T) -> Result<Vec<Field<'_>>, Error> {
    let mut fields = Vec::new();
    record.settable_fields(&mut fields)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(count = fields.len(), "discovered settable fields");

    Ok(fields)
}

impl<T: Settable + ?Sized> Settable for Box<T> {
    fn settable_fields<'a>(&'a mut self, fields: &mut Vec<Field<'a>>) -> Result<(), Error> {
        (**self).settable_fields(fields)
    }
}

impl<T: Settable + ?Sized> Discover for Box<T> {
    fn discover<'a>(&'a mut self, _: Member, fields: &mut Vec<Field<'a>>) -> Result<(), Error> {
        (**self).settable_fields(fields)
    }
}

// A `None` record is skipped and never allocated.
impl<T: Settable> Discover for Option<T> {
    fn discover<'a>(&'a mut self, _: Member, fields: &mut Vec<Field<'a>>) -> Result<(), Error> {
        match self {
            Some(inner) => inner.settable_fields(fields),
            None => Ok(()),
        }
    }
}

/// Generates no-op `Discover` impls
macro_rules! skip_members {
    ($(impl<$($g:ident),*> for $t:ty;)+) => {
        $(
            impl<$($g),*> Discover for $t {
                fn discover<'a>(
                    &'a mut self,
                    _: Member,
                    _: &mut Vec<Field<'a>>,
                ) -> Result<(), Error> {
                    Ok(())
                }
            }
        )+
    };
}

skip_members! {
    impl<T> for Vec<T>;
    impl<T> for VecDeque<T>;
    impl<K, V, S> for HashMap<K, V, S>;
    impl<K, V> for BTreeMap<K, V>;
    impl<T, S> for HashSet<T, S>;
    impl<T> for BTreeSet<T>;
    impl<T> for Sender<T>;
    impl<T> for SyncSender<T>;
    impl<T> for Receiver<T>;
    impl<T> for PhantomData<T>;
    impl<T> for *const T;
    impl<T> for *mut T;
    impl<R> for fn() -> R;
    impl<A, R> for fn(A) -> R;
    impl<A, B, R> for fn(A, B) -> R;
    impl<A, B, C, R> for fn(A, B, C) -> R;
    impl<> for Box<dyn Any>;
    impl<> for Box<dyn Any + Send>;
    impl<> for Box<dyn Any + Send + Sync>;
}

impl<T, const N: usize> Discover for [T; N] {
    fn discover<'a>(&'a mut self, _: Member, _: &mut Vec<Field<'a>>) -> Result<(), Error> {
        Ok(())
    }
}

impl<T, const N: usize> Discover for Option<[T; N]> {
    fn discover<'a>(&'a mut self, _: Member, _: &mut Vec<Field<'a>>) -> Result<(), Error> {
        Ok(())
    }
}

impl<T, const N: usize> Discover for Box<[T; N]> {
    fn discover<'a>(&'a mut self, _: Member, _: &mut Vec<Field<'a>>) -> Result<(), Error> {
        Ok(())
    }
}

/// Generates no-op `Discover` impls for `Option<T>` and `Box<T>`
macro_rules! skip_wrapped {
    ($(impl<$($g:ident),*> for $t:ty;)+) => {
        skip_members! {
            $(
                impl<$($g),*> for Option<$t>;
                impl<$($g),*> for Box<$t>;
            )+
        }
    };
}

// Pointers to non-records are skipped like the types they point to.
skip_wrapped! {
    impl<T> for Vec<T>;
    impl<T> for VecDeque<T>;
    impl<K, V, S> for HashMap<K, V, S>;
    impl<K, V> for BTreeMap<K, V>;
    impl<T, S> for HashSet<T, S>;
    impl<T> for BTreeSet<T>;
    impl<T> for Sender<T>;
    impl<T> for SyncSender<T>;
    impl<T> for Receiver<T>;
    impl<T> for PhantomData<T>;
    impl<T> for *const T;
    impl<T> for *mut T;
    impl<R> for fn() -> R;
    impl<A, R> for fn(A) -> R;
    impl<A, B, R> for fn(A, B) -> R;
    impl<A, B, C, R> for fn(A, B, C) -> R;
    impl<> for bool;
    impl<> for i8;
    impl<> for i16;
    impl<> for i32;
    impl<> for i64;
    impl<> for isize;
    impl<> for u8;
    impl<> for u16;
    impl<> for u32;
    impl<> for u64;
    impl<> for usize;
    impl<> for f32;
    impl<> for f64;
    impl<> for Complex<f32>;
    impl<> for Complex<f64>;
    impl<> for String;
    impl<> for Duration;
    impl<> for PathBuf;
}

skip_members! {
    impl<> for Option<Box<dyn Any>>;
    impl<> for Option<Box<dyn Any + Send>>;
    impl<> for Option<Box<dyn Any + Send + Sync>>;
}
