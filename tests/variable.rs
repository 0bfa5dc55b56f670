#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        redeclare_global in variable is OK
        "2"
    }

    tests! {
        duplicate_local in variable is ERR
        "Already a variable with name 'a' in this scope"
    }

    tests! {
        uninitialized in variable is OK
        "nil"
    }

    tests! {
        use_local_in_initializer in variable is ERR
        "Can't read local variable in its own initializer"
    }

    tests! {
        undefined_global in variable is ERR
        "Undefined variable 'notDefined'"
    }

    tests! {
        shadow_local in variable is OK
        "outer"
        "inner"
    }
}
