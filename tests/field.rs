#[macro_use]
mod common;

#[cfg(test)]
mod field {
    tests! {
        on_instance in field is OK
        "bar value"
        "baz value"
    }

    tests! {
        undefined in field is ERR
        "Undefined property 'bar'"
    }

    tests! {
        get_on_bool in field is ERR
        "Only instances have properties"
    }

    tests! {
        set_on_bool in field is ERR
        "Only instances have fields"
    }
}
