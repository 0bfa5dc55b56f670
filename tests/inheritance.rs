#[macro_use]
mod common;

#[cfg(test)]
mod inheritance {
    tests! {
        inherit_methods in inheritance is OK
        "A foo"
    }

    tests! {
        inherit_from_null in inheritance is ERR
        "Superclass must be a class"
    }
}
