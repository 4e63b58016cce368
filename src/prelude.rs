pub(crate) type Result<T, E = crate::errors::Error> = std::result::Result<T, E>;
