#[macro_use]
mod common;

#[cfg(test)]
mod call {
    tests! {
        bool in call is ERR
        "Can only call functions and classes"
    }

    tests! {
        num in call is ERR
        "Can only call functions and classes"
    }

    tests! {
        nil in call is ERR
        "Can only call functions and classes"
    }
}
