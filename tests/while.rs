#[macro_use]
mod common;

#[cfg(test)]
mod _while {
    tests! {
        basic in while is OK
        "0"
        "1"
        "2"
    }

    tests! {
        class_in_body in while is ERR
        "Expected expression"
    }

    tests! {
        closure_in_body in while is OK
        "1"
        "2"
        "3"
    }
}
