#[macro_use]
mod common;

#[cfg(test)]
mod _return {
    tests! {
        in_function in return is OK
        "done"
    }

    tests! {
        return_nil_if_no_value in return is OK
        "nil"
    }

    tests! {
        at_top_level in return is ERR
        "Can't return from top-level code"
    }
}
