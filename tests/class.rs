#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        empty in class is OK
        "<class Foo>"
    }

    tests! {
        inherit_self in class is ERR
        "A class can't inherit from itself"
    }

    tests! {
        inherited_method in class is OK
        "A method"
    }

    tests! {
        to_string in class is OK
        "<class Foo>"
        "<instance Foo>"
    }
}
