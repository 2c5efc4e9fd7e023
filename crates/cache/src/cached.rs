/// A lazily computed value that can be invalidated.
///
/// Starts [`Unset`](Cached::Unset), becomes [`Cached`](Cached::Cached) on first
/// access, and returns to `Unset` when invalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cached<T> {
	/// Nothing computed yet, or invalidated since.
	#[default]
	Unset,
	/// The computed value.
	Cached(T),
}

impl<T> Cached<T> {
	/// Returns the cached value, if any.
	pub fn get(&self) -> Option<&T> {
		match self {
			Self::Unset => None,
			Self::Cached(value) => Some(value),
		}
	}

	/// Returns `true` if a value is cached.
	pub fn is_cached(&self) -> bool {
		matches!(self, Self::Cached(_))
	}

	/// Drops the cached value.
	pub fn invalidate(&mut self) {
		*self = Self::Unset;
	}

	/// Returns the cached value, computing and storing it first if unset.
	///
	/// A failed computation leaves the value unset.
	pub fn get_or_try_insert_with<E>(&mut self, f: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
		if let Self::Unset = self {
			*self = Self::Cached(f()?);
		}
		match self {
			Self::Cached(value) => Ok(value),
			Self::Unset => unreachable!("value was just cached"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_failed_compute_stays_unset() {
		let mut value: Cached<u32> = Cached::Unset;
		let res: Result<&u32, &str> = value.get_or_try_insert_with(|| Err("nope"));
		assert!(res.is_err());
		assert!(!value.is_cached());
	}

	#[test]
	fn test_compute_once_then_invalidate() {
		let mut calls = 0;
		let mut value = Cached::Unset;
		for _ in 0..3 {
			let got = *value
				.get_or_try_insert_with(|| {
					calls += 1;
					Ok::<_, ()>(7)
				})
				.unwrap();
			assert_eq!(got, 7);
		}
		assert_eq!(calls, 1);

		value.invalidate();
		assert_eq!(value.get(), None);
	}
}
