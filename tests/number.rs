#[macro_use]
mod common;

#[cfg(test)]
mod number {
    tests! {
        literals in number is OK
        "123"
        "0"
        "123.456"
        "-0.001"
    }

    tests! {
        leading_dot in number is ERR
        "Expected expression"
    }

    tests! {
        trailing_dot in number is ERR
        "Expected property name after '.'"
    }
}
