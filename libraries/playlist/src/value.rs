//! Fallible value operations for caller-supplied tracks and params
//!
//! The playlist never assumes that copying a track or params value, or comparing
//! two tracks, succeeds. Ordinary `Clone`/`Ord` types get these traits for free;
//! types whose copies or comparisons can fail implement them directly.

use crate::error::ValueError;
use std::cmp::Ordering;

/// Copy that may fail
pub trait TryClone: Sized {
    /// Produce an independent copy of `self`
    fn try_clone(&self) -> Result<Self, ValueError>;
}

impl<T: Clone> TryClone for T {
    #[inline]
    fn try_clone(&self) -> Result<Self, ValueError> {
        Ok(self.clone())
    }
}

/// Total order over tracks whose comparison may fail
///
/// Two tracks comparing `Equal` are the same track: the registry keeps only the
/// first one it saw.
pub trait TrackOrd {
    /// Compare `self` with `other`
    fn try_cmp(&self, other: &Self) -> Result<Ordering, ValueError>;
}

impl<T: Ord + ?Sized> TrackOrd for T {
    #[inline]
    fn try_cmp(&self, other: &Self) -> Result<Ordering, ValueError> {
        Ok(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    impl TryClone for Refusing {
        fn try_clone(&self) -> Result<Self, ValueError> {
            Err("refused".into())
        }
    }

    #[test]
    fn clone_types_never_fail() {
        let copy = String::from("intro").try_clone().unwrap();
        assert_eq!(copy, "intro");
    }

    #[test]
    fn ord_types_compare_normally() {
        assert_eq!(1.try_cmp(&2).unwrap(), Ordering::Less);
        assert_eq!("b".try_cmp("a").unwrap(), Ordering::Greater);
    }

    #[test]
    fn custom_impl_reports_failure() {
        assert!(Refusing.try_clone().is_err());
    }
}
