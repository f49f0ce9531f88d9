#[macro_export]
macro_rules! assert_slugs {
    (
        $(
            $test_name:ident : url => $url:expr, slug => $slug:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                assert_that(&slugmap::get_slug($url)).is_equal_to($slug.to_owned());
            }
        )+
    }
}
