//! Duration algebra: value objects for delays and durations, expressed as
//! either an absolute wall-clock length or a fraction of a parent's
//! duration. Pure and dependency-free beyond `std::time::Duration`.

use std::time::Duration;

use crate::error::TraceSimError;

/// A duration expression: an absolute length, or a fraction of whatever
/// base duration it is resolved against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationExpr {
	Absolute(Duration),
	Relative(f64),
}

impl DurationExpr {
	/// Builds an absolute expression from a (possibly user-supplied, hence
	/// possibly negative) number of seconds.
	pub fn absolute_seconds(seconds: f64) -> Result<Self, TraceSimError> {
		if !seconds.is_finite() || seconds < 0.0 || seconds > Duration::MAX.as_secs_f64() {
			return Err(TraceSimError::NegativeAbsoluteDuration { seconds });
		}
		Ok(DurationExpr::Absolute(Duration::from_secs_f64(seconds)))
	}

	/// Builds an absolute expression directly from a `Duration`. Infallible:
	/// `std::time::Duration` cannot represent a negative length.
	pub fn absolute(duration: Duration) -> Self {
		DurationExpr::Absolute(duration)
	}

	/// Builds a relative expression from a fraction of the base duration.
	pub fn relative(fraction: f64) -> Result<Self, TraceSimError> {
		if fraction < 0.0 {
			return Err(TraceSimError::NegativeRelativeFraction { fraction });
		}
		Ok(DurationExpr::Relative(fraction))
	}

	#[no_panic::no_panic]
	pub fn is_relative(&self) -> bool {
		matches!(self, DurationExpr::Relative(_))
	}

	/// Resolves the expression against an optional base (parent) duration.
	///
	/// `Absolute` ignores the base entirely. `Relative` requires a base
	/// `> 0` and returns `fraction * base` truncated toward zero at
	/// nanosecond precision.
	pub fn resolve(&self, base: Option<Duration>) -> Result<Duration, TraceSimError> {
		match self {
			DurationExpr::Absolute(d) => Ok(*d),
			DurationExpr::Relative(fraction) => {
				let base = base.ok_or(TraceSimError::MissingParentContext)?;
				if base.is_zero() {
					return Err(TraceSimError::NonPositiveBase);
				}
				let nanos = (base.as_nanos() as f64) * fraction;
				Ok(Duration::from_nanos(nanos as u64))
			}
		}
	}
}

/// A delay relative to the start of the enclosing (parent) context.
/// Resolving a delay additionally requires the result to be `>= 0`, which
/// is guaranteed trivially since `std::time::Duration` cannot be negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delay(DurationExpr);

impl Delay {
	pub fn new(expr: DurationExpr) -> Self {
		Delay(expr)
	}

	pub fn resolve(&self, parent_duration: Option<Duration>) -> Result<Duration, TraceSimError> {
		self.0.resolve(parent_duration)
	}
}

/// A task or span duration. Resolving a duration additionally requires the
/// result to be strictly `> 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskDuration(DurationExpr);

impl TaskDuration {
	pub fn new(expr: DurationExpr) -> Self {
		TaskDuration(expr)
	}

	pub fn resolve(&self, parent_duration: Option<Duration>) -> Result<Duration, TraceSimError> {
		let resolved = self.0.resolve(parent_duration)?;
		if resolved.is_zero() {
			return Err(TraceSimError::NonPositiveBase);
		}
		Ok(resolved)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn absolute_ignores_base() {
		let expr = DurationExpr::absolute(Duration::from_secs(3));
		assert_eq!(expr.resolve(None).unwrap(), Duration::from_secs(3));
		assert_eq!(
			expr.resolve(Some(Duration::from_secs(99))).unwrap(),
			Duration::from_secs(3)
		);
	}

	#[test]
	fn relative_requires_parent() {
		let expr = DurationExpr::relative(0.5).unwrap();
		assert!(matches!(
			expr.resolve(None),
			Err(TraceSimError::MissingParentContext)
		));
	}

	#[test]
	fn relative_requires_positive_base() {
		let expr = DurationExpr::relative(0.5).unwrap();
		assert!(matches!(
			expr.resolve(Some(Duration::ZERO)),
			Err(TraceSimError::NonPositiveBase)
		));
	}

	#[test]
	fn relative_resolves_fraction_of_base() {
		let expr = DurationExpr::relative(0.5).unwrap();
		let resolved = expr.resolve(Some(Duration::from_secs(2))).unwrap();
		assert_eq!(resolved, Duration::from_secs(1));
	}

	#[test]
	fn negative_fraction_rejected_at_construction() {
		assert!(matches!(
			DurationExpr::relative(-0.1),
			Err(TraceSimError::NegativeRelativeFraction { .. })
		));
	}

	#[test]
	fn negative_absolute_seconds_rejected_at_construction() {
		assert!(matches!(
			DurationExpr::absolute_seconds(-1.0),
			Err(TraceSimError::NegativeAbsoluteDuration { .. })
		));
	}

	#[test]
	fn non_finite_absolute_seconds_rejected_at_construction() {
		assert!(matches!(
			DurationExpr::absolute_seconds(f64::NAN),
			Err(TraceSimError::NegativeAbsoluteDuration { .. })
		));
		assert!(matches!(
			DurationExpr::absolute_seconds(f64::INFINITY),
			Err(TraceSimError::NegativeAbsoluteDuration { .. })
		));
	}

	#[test]
	fn overflowing_absolute_seconds_rejected_at_construction() {
		assert!(matches!(
			DurationExpr::absolute_seconds(1e300),
			Err(TraceSimError::NegativeAbsoluteDuration { .. })
		));
	}

	#[test]
	fn duration_resolve_rejects_non_positive_result() {
		let duration = TaskDuration::new(DurationExpr::absolute(Duration::ZERO));
		assert!(matches!(
			duration.resolve(None),
			Err(TraceSimError::NonPositiveBase)
		));
	}

	#[test]
	fn delay_resolve_allows_zero() {
		let delay = Delay::new(DurationExpr::absolute(Duration::ZERO));
		assert_eq!(delay.resolve(None).unwrap(), Duration::ZERO);
	}
}
