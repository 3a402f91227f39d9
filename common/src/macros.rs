//! Small helper macros shared by all crates.
//!

/// Build a `PathBuf` out of several components.
///
/// ```
/// use std::path::PathBuf;
/// use cotwatch_common::makepath;
///
/// let p: PathBuf = makepath!("output", "alerts.kml");
/// assert_eq!(PathBuf::from("output/alerts.kml"), p);
/// ```
///
#[macro_export]
macro_rules! makepath {
    ($($item:expr),+) => {
        [
        $(::std::path::PathBuf::from($item),)+
        ]
        .iter()
        .collect::<::std::path::PathBuf>()
    };
}
