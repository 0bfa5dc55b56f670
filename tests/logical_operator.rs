#[macro_use]
mod common;

#[cfg(test)]
mod logical_operator {
    tests! {
        and in logical_operator is OK
        "2"
        "false"
    }

    tests! {
        or in logical_operator is OK
        "ok"
        "1"
    }
}
