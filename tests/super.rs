#[macro_use]
mod common;

#[cfg(test)]
mod _super {
    tests! {
        call_superclass_method in super is OK
        "B method"
        "A method"
    }

    tests! {
        no_superclass in super is ERR
        "Can't use 'super' in a class with no superclass"
    }

    tests! {
        outside_class in super is ERR
        "Can't use 'super' outside of a class"
    }
}
