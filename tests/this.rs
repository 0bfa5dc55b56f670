#[macro_use]
mod common;

#[cfg(test)]
mod this {
    tests! {
        bound_in_method in this is OK
        "The Egotist"
    }

    tests! {
        nested_closure_captures_this in this is OK
        "<instance Thing>"
    }

    tests! {
        outside_class in this is ERR
        "Can't use 'this' outside of a class"
    }
}
