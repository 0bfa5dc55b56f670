#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        literals in string is OK
        "hello"
        ""
        "abc"
    }

    tests! {
        multiline in string is OK
        "1
2
3"
    }

    tests! {
        unterminated in string is ERR
        "Unterminated string"
    }
}
