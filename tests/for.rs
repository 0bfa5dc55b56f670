#[macro_use]
mod common;

#[cfg(test)]
mod _for {
    tests! {
        basic in for is OK
        "0"
        "1"
        "2"
    }

    tests! {
        class_in_body in for is ERR
        "Expected expression"
    }
}
