#[macro_use]
mod common;

#[cfg(test)]
mod function {
    tests! {
        parameters in function is OK
        "3"
    }

    tests! {
        missing_arguments in function is ERR
        "Expected 2 arguments but got 1"
    }

    tests! {
        print in function is OK
        "<function foo>"
        "<native function clock>"
    }

    tests! {
        too_many_parameters in function is ERR
        "Cannot have more than 255 parameters"
    }
}
