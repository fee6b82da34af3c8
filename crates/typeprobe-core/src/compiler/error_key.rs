/// Key of a compile error: `path:line:column`, both numbers 1-based
pub fn create_error_key(file_path: &str, line: usize, column: usize) -> String {
    format!("{}:{}:{}", file_path, line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_format() {
        assert_eq!(create_error_key("/p/a.ts", 3, 14), "/p/a.ts:3:14");
    }

    proptest! {
        #[test]
        fn test_key_ends_with_position(path in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}\\.ts", line in 1usize..10_000, column in 1usize..500) {
            let key = create_error_key(&path, line, column);
            let mut parts = key.rsplitn(3, ':');
            let column_str = column.to_string();
            let line_str = line.to_string();
            prop_assert_eq!(parts.next(), Some(column_str.as_str()));
            prop_assert_eq!(parts.next(), Some(line_str.as_str()));
            prop_assert_eq!(parts.next(), Some(path.as_str()));
        }
    }
}
