use crate::error::FetchError;
use crate::model::Record;

/// Lazily provides the acquisitions owned by a session.
///
/// Implemented by the record adapters (snapshot files, remote API). The engine calls it at
/// most once per session evaluation and never for sessions without an identifier.
pub trait AcquisitionSource {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError>;
}

impl<T: AcquisitionSource + ?Sized> AcquisitionSource for &T {
    fn acquisitions(&self, session: &Record) -> Result<Vec<Record>, FetchError> {
        (**self).acquisitions(session)
    }
}
