#[macro_use]
mod common;

#[cfg(test)]
mod _if {
    tests! {
        dangling_else in if is OK
        "good"
    }

    tests! {
        class_in_then in if is ERR
        "Expected expression"
    }
}
