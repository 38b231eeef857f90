pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        malformed(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn malformed(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::Decode {
        element: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_len(buf: &[u8]) -> super::Result<()> {
        verify_data!(buf, buf.len() >= 2);
        Ok(())
    }

    fn check_width(width: usize) -> super::Result<()> {
        verify_arg!(width, width > 0);
        Ok(())
    }

    #[test]
    fn test_verify_macros() {
        assert!(check_len(&[1, 2]).is_ok());
        match check_len(&[1]).unwrap_err().kind() {
            ErrorKind::Decode { element, message } => {
                assert_eq!(element, "buf");
                assert_eq!(message, "buf.len() >= 2");
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(matches!(
            check_width(0).unwrap_err().kind(),
            ErrorKind::InvalidArgument { .. }
        ));
    }
}
