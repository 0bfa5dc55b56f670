#[macro_use]
mod common;

#[cfg(test)]
mod assignment {
    tests! {
        global in assignment is OK
        "before"
        "after"
    }

    tests! {
        local in assignment is OK
        "before"
        "after"
    }

    tests! {
        grouping in assignment is ERR
        "Invalid assignment target"
    }

    tests! {
        undefined in assignment is ERR
        "Undefined variable 'unknown'"
    }
}
