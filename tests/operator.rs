#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        add in operator is OK
        "3"
        "ab"
    }

    tests! {
        comparison in operator is OK
        "true"
        "false"
        "true"
        "false"
        "true"
    }

    tests! {
        equals in operator is OK
        "true"
        "false"
        "true"
        "true"
    }

    tests! {
        subtract_non_number in operator is ERR
        "Operands must be numbers"
    }

    tests! {
        greater_non_number in operator is ERR
        "Operands must be numbers"
    }

    tests! {
        negate_non_number in operator is ERR
        "Operand of unary '-' must be a number"
    }
}
