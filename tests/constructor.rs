#[macro_use]
mod common;

#[cfg(test)]
mod constructor {
    tests! {
        default in constructor is OK
        "<instance Foo>"
    }

    tests! {
        early_return in constructor is OK
        "init"
        "<instance Foo>"
    }

    tests! {
        return_value in constructor is ERR
        "Can't return a value from an initializer"
    }

    tests! {
        missing_arguments in constructor is ERR
        "Expected 2 arguments but got 1"
    }
}
