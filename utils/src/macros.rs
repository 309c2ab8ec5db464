/// Concatenates supplied slices into one continuous vector.
#[macro_export]
macro_rules! concat_slices {
    ($($slice: expr),+) => {
        [$(&$slice[..]),+].concat()
    }
}

/// Return `$error` if `$left` not equals `$right`
#[macro_export]
macro_rules! expect_equality {
    ($left: expr, $right: expr, $error: expr) => {
        if $left != $right {
            return Err($error($left, $right));
        }
    };
}

/// Evaluate 2 or 3 expressions on the rayon pool, returning a flat tuple of results.
#[cfg(feature = "parallel")]
#[macro_export]
macro_rules! join {
    ($a: expr, $b: expr) => {
        rayon::join(|| $a, || $b)
    };
    ($a: expr, $b: expr, $c: expr) => {{
        let (_a, (_b, _c)) = rayon::join(|| $a, || rayon::join(|| $b, || $c));
        (_a, _b, _c)
    }};
}

/// Sequential fallback of [`join!`]: plain tuple evaluation.
#[cfg(not(feature = "parallel"))]
#[macro_export]
macro_rules! join {
    ($a: expr, $b: expr) => {
        ($a, $b)
    };
    ($a: expr, $b: expr, $c: expr) => {
        ($a, $b, $c)
    };
}
