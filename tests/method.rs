#[macro_use]
mod common;

#[cfg(test)]
mod method {
    tests! {
        arity in method is OK
        "3"
    }

    tests! {
        not_found in method is ERR
        "Undefined property 'unknown'"
    }
}
