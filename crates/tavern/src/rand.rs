/// A trait for random sources that return random integers.
///
/// Every worker owns its own source, so implementations take `&mut self` and
/// never need to be shared. Tests plug in fixed sequences to steer which
/// resource a worker picks first.
///
/// # Example
/// ```
/// use tavern::RandSource;
///
/// struct FixedRand;
/// impl RandSource<u64> for FixedRand {
///     fn rand(&mut self) -> u64 {
///         1234
///     }
/// }
///
/// let mut rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// ```
pub trait RandSource<T> {
    /// Returns a random integer.
    fn rand(&mut self) -> T;
}
