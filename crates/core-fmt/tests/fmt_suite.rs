//! End-to-end formatter suite: pinned output bytes and the exact error
//! message catalogue, checked through a recording parse-error handler.

use std::cell::RefCell;

use core_fmt::writer::CountingWriter;
use core_fmt::{fmt_args, fmt_to_writer, sprint, FmtArg, FmtCustom, Interp};
use core_memory::context::with_context_var;

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

fn recording_handler(message: &str, _fmt_string: &str, _position: i64) {
    LAST_ERROR.with(|e| *e.borrow_mut() = message.to_owned());
}

fn format_expecting_error(fmt_string: &str, args: &[FmtArg<'_>]) -> String {
    LAST_ERROR.with(|e| e.borrow_mut().clear());
    with_context_var(
        |ctx| ctx.fmt_parse_error_handler = recording_handler,
        || {
            let mut sink = CountingWriter::new();
            fmt_to_writer(&mut sink, fmt_string, args);
        },
    );
    LAST_ERROR.with(|e| e.borrow().clone())
}

macro_rules! expect_error {
    ($expected:expr, $fmt:expr) => {
        assert_eq!(format_expecting_error($fmt, &[]), $expected, "fmt {:?}", $fmt);
    };
    ($expected:expr, $fmt:expr, $($args:tt)+) => {
        assert_eq!(
            format_expecting_error($fmt, &fmt_args!($($args)+)),
            $expected,
            "fmt {:?}",
            $fmt
        );
    };
}

macro_rules! check_write {
    ($expected:expr, $fmt:expr) => {
        assert_eq!(sprint!($fmt), $expected, "fmt {:?}", $fmt);
    };
    ($expected:expr, $fmt:expr, $($args:tt)+) => {
        assert_eq!(sprint!($fmt, $($args)+), $expected, "fmt {:?}", $fmt);
    };
}

#[test]
fn write_bool() {
    check_write!("true", "{}", true);
    check_write!("false", "{}", false);
    check_write!("1", "{:d}", true);
    check_write!("true ", "{:5}", true);
}

#[test]
fn write_integers() {
    check_write!("42", "{}", 42);
    check_write!("-42", "{}", -42);
    check_write!("12", "{}", 12u16);
    check_write!("34", "{}", 34u32);
    check_write!("56", "{}", 56i64);
    check_write!("-2147483648", "{}", i32::MIN);
    check_write!("2147483647", "{}", i32::MAX);
    check_write!("4294967295", "{}", u32::MAX);
    check_write!("-9223372036854775808", "{}", i64::MIN);
    check_write!("9223372036854775807", "{}", i64::MAX);
    check_write!("18446744073709551615", "{}", u64::MAX);
}

#[test]
fn format_int_binary() {
    check_write!("0", "{0:b}", 0);
    check_write!("101010", "{0:b}", 42);
    check_write!("101010", "{0:b}", 42u32);
    check_write!("-101010", "{0:b}", -42);
    check_write!("11000000111001", "{0:b}", 12345);
    check_write!("10010001101000101011001111000", "{0:b}", 0x12345678);
    check_write!("10010000101010111100110111101111", "{0:b}", 0x90ABCDEFu32);
    check_write!("11111111111111111111111111111111", "{0:b}", u32::MAX);
}

#[test]
fn format_int_octal() {
    check_write!("0", "{0:o}", 0);
    check_write!("42", "{0:o}", 0o42);
    check_write!("-42", "{0:o}", -0o42);
    check_write!("12345670", "{0:o}", 0o12345670);
}

#[test]
fn format_int_hexadecimal() {
    check_write!("0", "{0:x}", 0);
    check_write!("42", "{0:x}", 0x42);
    check_write!("-42", "{0:x}", -0x42);
    check_write!("12345678", "{0:x}", 0x12345678);
    check_write!("90abcdef", "{0:x}", 0x90abcdefu32);
    check_write!("12345678", "{0:X}", 0x12345678);
    check_write!("90ABCDEF", "{0:X}", 0x90ABCDEFu32);
}

#[test]
fn format_int_grouped() {
    check_write!("123", "{:n}", 123);
    check_write!("1,234", "{:n}", 1234);
    check_write!("1,234,567", "{:n}", 1234567);
    check_write!("4,294,967,295", "{:n}", u32::MAX);
}

#[test]
fn write_floats() {
    check_write!("4.2", "{}", 4.2);
    check_write!("-4.2", "{}", -4.2);
    check_write!("2.2250738585072014e-308", "{}", f64::MIN_POSITIVE);
    check_write!("1.7976931348623157e+308", "{}", f64::MAX);
    check_write!("0", "{}", 0.0f32);
    check_write!("392.500000", "{0:f}", 392.5f32);
    check_write!("12.500000%", "{0:%}", 0.125f32);
}

#[test]
fn format_f64_types() {
    check_write!("0", "{}", 0.0);
    check_write!("0", "{:}", 0.0);
    check_write!("0.000000", "{:f}", 0.0);
    check_write!("0", "{:g}", 0.0);
    check_write!("392.65", "{:}", 392.65);
    check_write!("392.65", "{:g}", 392.65);
    check_write!("392.65", "{:G}", 392.65);
    check_write!("4.9014e+06", "{:g}", 4.9014e6);
    check_write!("392.650000", "{:f}", 392.65);
    check_write!("392.650000", "{:F}", 392.65);
    check_write!("12.500000%", "{:%}", 0.125);
    check_write!("12.34%", "{:.2%}", 0.1234432);
    check_write!("3.926490e+02", "{0:e}", 392.649);
    check_write!("3.926490E+02", "{0:E}", 392.649);
    check_write!("+0000392.6", "{0:+010.4g}", 392.649);
}

#[test]
fn format_nan_and_inf() {
    let nan = f64::NAN;
    check_write!("nan", "{}", nan);
    check_write!("+nan", "{:+}", nan);
    check_write!(" nan", "{: }", nan);
    check_write!("NAN", "{:F}", nan);
    check_write!("nan    ", "{:<7}", nan);
    check_write!("  nan  ", "{:^7}", nan);
    check_write!("    nan", "{:>7}", nan);
    check_write!("nan%", "{:%}", nan);

    let inf = f64::INFINITY;
    check_write!("inf", "{}", inf);
    check_write!("+inf", "{:+}", inf);
    check_write!("-inf", "{}", -inf);
    check_write!(" inf", "{: }", inf);
    check_write!("INF", "{:F}", inf);
    check_write!("inf    ", "{:<7}", inf);
    check_write!("  inf  ", "{:^7}", inf);
    check_write!("    inf", "{:>7}", inf);
    check_write!("inf%", "{:%}", inf);
}

#[test]
fn precision_rounding() {
    check_write!("0", "{:.0f}", 0.0);
    check_write!("0", "{:.0f}", 0.01);
    check_write!("0", "{:.0f}", 0.1);
    check_write!("0.000", "{:.3f}", 0.00049);
    check_write!("0.001", "{:.3f}", 0.0005);
    check_write!("0.001", "{:.3f}", 0.00149);
    check_write!("0.002", "{:.3f}", 0.0015);
    check_write!("1.000", "{:.3f}", 0.9999);
    check_write!("0.00123", "{:.3}", 0.00123);
    check_write!("0.1", "{:.16g}", 0.1);
    check_write!("1", "{:.0}", 1.0);
    check_write!("-761519619559038.3", "{:.1f}", -761519619559038.2);
    check_write!("1.9156918820264798e-56", "{}", 1.9156918820264798e-56);
    check_write!("0.0000", "{:.4f}", 7.2809479766055470e-15);
    check_write!("3788512123356.985352", "{:f}", 3788512123356.985352);
}

#[test]
fn prettify_float() {
    check_write!("0.0001", "{}", 1e-4);
    check_write!("1e-05", "{}", 1e-5);
    check_write!("1000000000000000", "{}", 1e15);
    check_write!("1e+16", "{}", 1e16);
    check_write!("9.999e-05", "{}", 9.999e-5);
    check_write!("10000000000", "{}", 1e10);
    check_write!("100000000000", "{}", 1e11);
    check_write!("12340000000", "{}", 1234e7);
    check_write!("12.34", "{}", 1234e-2);
    check_write!("0.001234", "{}", 1234e-6);
    check_write!("0.1", "{}", 0.1f32);
    check_write!("0.1", "{}", 0.1);
    check_write!("1.3563156e-19", "{}", 1.35631564e-19f32);
    check_write!("1019666400", "{}", 1019666432.0f32);
}

#[test]
fn hash_flag() {
    check_write!("42", "{0:#}", 42);
    check_write!("-42", "{0:#}", -42);
    check_write!("0b101010", "{0:#b}", 42);
    check_write!("0B101010", "{0:#B}", 42);
    check_write!("-0b101010", "{0:#b}", -42);
    check_write!("0x42", "{0:#x}", 0x42);
    check_write!("0X42", "{0:#X}", 0x42);
    check_write!("-0x42", "{0:#x}", -0x42);
    check_write!("042", "{0:#o}", 0o42);
    check_write!("-042", "{0:#o}", -0o42);
    check_write!("42", "{0:#}", 42u32);
    check_write!("0x42", "{0:#x}", 0x42u32);
    check_write!("042", "{0:#o}", 0o42u32);
    check_write!("-42.0", "{0:#}", -42.0);
    check_write!("-42.01", "{0:#}", -42.01);
    check_write!("4.e+01", "{0:#.0e}", 42.0);
    check_write!("0.", "{:#.0f}", 0.01);
    check_write!("0.50", "{:#.2g}", 0.5);
    check_write!("1.", "{:#.0f}", 0.5);
    check_write!("0.", "{:#.0f}", 0.2);
    check_write!("1.", "{:#.0f}", 0.51);
    check_write!("1.e+01", "{:#.0e}", 9.5);
    check_write!("9.e+00", "{:#.0e}", 9.1);
    check_write!("123.", "{:#.0f}", 123.0);
    check_write!("  42.0", "{:#6}", 42.0);
}

#[test]
fn more_precision_cases() {
    check_write!("1.2", "{0:.2}", 1.2345);
    check_write!("1.2e+56", "{:.2}", 1.234e56);
    check_write!("1.1", "{0:.3}", 1.1);
    check_write!("  0.0e+00", "{:9.1e}", 0.0);
    check_write!("1.23", "{:.02f}", 1.234);
    check_write!("0.001", "{:.1g}", 0.001);
    check_write!("1e+01", "{:.0e}", 9.5);
    check_write!("9e+00", "{:.0e}", 9.1);
    check_write!("1.0e-34", "{:.1e}", 1e-34);
    check_write!("st", "{0:.2}", "str");
    check_write!("st", "{0:.{1}}", "str", 2);
    check_write!("1.2", "{0:.{1}}", 1.2345, 2);
    check_write!("1.2", "{:.{}}", 1.2345, 2);
}

#[test]
fn escape_brackets() {
    check_write!("{", "{{");
    check_write!("before {", "before {{");
    check_write!("{ after", "{{ after");
    check_write!("before { after", "before {{ after");
    check_write!("}", "}}");
    check_write!("before }", "before }}");
    check_write!("} after", "}} after");
    check_write!("before } after", "before }} after");
    check_write!("{}", "{{}}");
    check_write!("{42}", "{{{0}}}", 42);
}

#[test]
fn args_in_different_positions() {
    check_write!("42", "{0}", 42);
    check_write!("before 42", "before {0}", 42);
    check_write!("42 after", "{0} after", 42);
    check_write!("before 42 after", "before {0} after", 42);
    check_write!("answer = 42", "{0} = {1}", "answer", 42);
    check_write!("42 is the answer", "{1} is the {0}", "answer", 42);
    check_write!("abracadabra", "{0}{1}{0}", "abra", "cad");
}

#[test]
fn named_arguments() {
    check_write!("Hello Jon!", "Hello {name}!", name = "Jon");
    check_write!(
        "Jon is 10 seconds late",
        "{name} is {seconds} seconds late",
        name = "Jon",
        seconds = 10
    );
    expect_error!("There is no argument with this name", "{name}", "Jon");
}

#[test]
fn args_errors() {
    expect_error!("Invalid format string", "{");
    expect_error!("Format string ended abruptly", "{0");
    expect_error!("Argument index out of range", "{0}");
    expect_error!(
        "Unmatched \"}\" in format string - if you want to print it use \"}}\" to escape",
        "}"
    );
    expect_error!("Expected \":\" or \"}\"", "{0{}");
    expect_error!("\"}\" expected", "{0:v", 42);
}

#[test]
fn many_args() {
    check_write!(
        "1234567891011121314151617181920",
        "{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}{}",
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20
    );
}

#[test]
fn auto_arg_index() {
    check_write!("abc", "{}{}{}", "a", "b", "c");
    expect_error!(
        "Cannot switch from manual to automatic argument indexing",
        "{0}{}",
        'a',
        'b'
    );
    expect_error!(
        "Cannot switch from automatic to manual argument indexing",
        "{}{0}",
        'a',
        'b'
    );
    expect_error!(
        "Cannot switch from automatic to manual argument indexing",
        "{:.{1}}",
        1.2345,
        2
    );
}

#[test]
fn empty_specs() {
    check_write!("42", "{0:}", 42);
}

#[test]
fn left_align() {
    check_write!("42  ", "{0:<4}", 42);
    check_write!("42  ", "{0:<4o}", 0o42);
    check_write!("42  ", "{0:<4x}", 0x42);
    check_write!("-42  ", "{0:<5}", -42);
    check_write!("42   ", "{0:<5}", 42u32);
    check_write!("-42  ", "{0:<5}", -42.0);
    check_write!("c    ", "{0:<5}", "c");
    check_write!("abc  ", "{0:<5}", "abc");
    check_write!("0xface  ", "{0:<8}", 0xface as *const ());
}

#[test]
fn right_align() {
    check_write!("  42", "{0:>4}", 42);
    check_write!("  42", "{0:>4o}", 0o42);
    check_write!("  42", "{0:>4x}", 0x42);
    check_write!("  -42", "{0:>5}", -42);
    check_write!("   42", "{0:>5}", 42u32);
    check_write!("  -42", "{0:>5}", -42.0);
    check_write!("    c", "{0:>5}", "c");
    check_write!("  abc", "{0:>5}", "abc");
    check_write!("  0xface", "{0:>8}", 0xface as *const ());
}

#[test]
fn numeric_align() {
    check_write!("  42", "{0:=4}", 42);
    check_write!("+ 42", "{0:=+4}", 42);
    check_write!("  42", "{0:=4o}", 0o42);
    check_write!("+ 42", "{0:=+4o}", 0o42);
    check_write!("  42", "{0:=4x}", 0x42);
    check_write!("+ 42", "{0:=+4x}", 0x42);
    check_write!("-  42", "{0:=5}", -42);
    check_write!("   42", "{0:=5}", 42u32);
    check_write!("-  42", "{0:=5}", -42.0);
    check_write!(" 1", "{:= }", 1.0);

    expect_error!("\"}\" expected", "{0:=5", 'a');
    expect_error!(
        "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #",
        "{0:=5c}",
        'a'
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:=5}",
        "abc"
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:=8}",
        0xface as *const ()
    );
}

#[test]
fn center_align() {
    check_write!(" 42  ", "{0:^5}", 42);
    check_write!(" -42 ", "{0:^5}", -42);
    check_write!(" 42  ", "{0:^5}", 42u32);
    check_write!(" -42 ", "{0:^5}", -42.0);
    check_write!("  c  ", "{0:^5}", "c");
    check_write!(" abc  ", "{0:^6}", "abc");
    check_write!(" 0xface ", "{0:^8}", 0xface as *const ());
}

#[test]
fn fill() {
    expect_error!("Invalid fill character \"{\"", "{0:{<5}", 'c');

    check_write!("**42", "{0:*>4}", 42);
    check_write!("**-42", "{0:*>5}", -42);
    check_write!("***42", "{0:*>5}", 42u32);
    check_write!("**-42", "{0:*>5}", -42.0);
    check_write!("c****", "{0:*<5}", "c");
    check_write!("abc**", "{0:*<5}", "abc");
    check_write!("**0xface", "{0:*>8}", 0xface as *const ());
    check_write!("foo=", "{:}=", "foo");

    check_write!("ФФ42", "{0:Ф>4}", 42);
    check_write!("\u{0904}\u{0904}42", "{0:\u{0904}>4}", 42);
    check_write!("\u{2070E}\u{2070E}42", "{0:\u{2070E}>4}", 42);
}

#[test]
fn plus_sign() {
    check_write!("+42", "{0:+}", 42);
    check_write!("-42", "{0:+}", -42);
    check_write!("+42", "{0:+}", 42i64);
    check_write!("+42", "{0:+}", 42.0);

    expect_error!(
        "Format specifier requires a signed integer argument (got unsigned)",
        "{0:+}",
        42u32
    );
    expect_error!("\"}\" expected", "{0:+", 'c');
    expect_error!(
        "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #",
        "{0:+c}",
        'c'
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:+}",
        "abc"
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:+}",
        0x42 as *const ()
    );
}

#[test]
fn minus_sign() {
    check_write!("42", "{0:-}", 42);
    check_write!("-42", "{0:-}", -42);
    check_write!("42", "{0:-}", 42.0);
    expect_error!(
        "Format specifier requires a signed integer argument (got unsigned)",
        "{0:-}",
        42u32
    );
}

#[test]
fn space_sign() {
    check_write!(" 42", "{0: }", 42);
    check_write!("-42", "{0: }", -42);
    check_write!(" 42", "{0: }", 42.0);
    expect_error!(
        "Format specifier requires a signed integer argument (got unsigned)",
        "{0: }",
        42u32
    );
    expect_error!("\"}\" expected", "{0: ", 'c');
    expect_error!(
        "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #",
        "{0: c}",
        'c'
    );
}

#[test]
fn hash_flag_errors() {
    expect_error!("\"}\" expected", "{0:#", 'c');
    expect_error!(
        "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #",
        "{0:#c}",
        'c'
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:#}",
        "abc"
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:#}",
        0x42 as *const ()
    );
}

#[test]
fn zero_flag() {
    check_write!("42", "{0:0}", 42);
    check_write!("-0042", "{0:05}", -42);
    check_write!("00042", "{0:05}", 42u32);
    check_write!("-0042", "{0:05}", -42.0);

    expect_error!("\"}\" expected", "{0:0", 'c');
    expect_error!(
        "Invalid format specifier(s) for code point - code points can't have numeric alignment, signs or #",
        "{0:0c}",
        'c'
    );
    expect_error!(
        "Format specifier requires an arithmetic argument",
        "{0:0}",
        "abc"
    );
}

#[test]
fn width() {
    expect_error!(
        "We parsed an integer width which was too large",
        "{0:999999999999999999}",
        0
    );

    check_write!(" -42", "{0:4}", -42);
    check_write!("   42", "{0:5}", 42u32);
    check_write!("   -0.25", "{0:8}", -0.25);
    check_write!("    -0.25", "{0:9}", -0.25);
    check_write!("    0xcafe", "{0:10}", 0xcafe as *const ());
    check_write!("x          ", "{0:11}", "x");
    check_write!("str         ", "{0:12}", "str");
    check_write!("**🤡**", "{:*^5}", "🤡");
    check_write!("**🤡**", "{:*^5c}", '🤡');
    check_write!("**你好**", "{:*^6}", "你好");
    check_write!("x     ", "{:6c}", 'x');
    check_write!("000000", "{:>06.0f}", 0.00884311);
    check_write!("0.009", "{:#.3f}", 0.00884311);
}

#[test]
fn dynamic_width() {
    expect_error!(
        "Expected a closing \"}\" after parsing an argument ID for a dynamic width",
        "{0:{",
        0
    );
    expect_error!("\"}\" expected", "{0:{}", 0);
    expect_error!("Expected a number - an index to an argument", "{0:{?}}", 0);
    expect_error!("Argument index out of range", "{0:{1}}", 0);
    expect_error!(
        "Expected a closing \"}\" after parsing an argument ID for a dynamic width",
        "{0:{0:}}",
        0
    );
    expect_error!("Negative width", "{0:{1}}", 0, -1);
    expect_error!("Width value is too big", "{0:{1}}", 0, (i32::MAX as u64 + 1));
    expect_error!("Negative width", "{0:{1}}", 0, -1i64);
    expect_error!("Width was not an integer", "{0:{1}}", 0, "0");
    expect_error!("Width was not an integer", "{0:{1}}", 0, 0.0);

    check_write!(" -42", "{0:{1}}", -42, 4);
    check_write!("   42", "{0:{1}}", 42u32, 5);
    check_write!("   -0.25", "{0:{1}}", -0.25, 8);
    check_write!("    0xcafe", "{0:{1}}", 0xcafe as *const (), 10);
    check_write!("x          ", "{0:{1}}", "x", 11);
}

#[test]
fn precision_errors() {
    expect_error!(
        "We parsed an integer precision which was too large",
        "{0:.999999999999999999}",
        0
    );
    expect_error!(
        "Missing precision specifier (we parsed a dot but nothing valid after that)",
        "{0:.",
        0
    );
    expect_error!(
        "Missing precision specifier (we parsed a dot but nothing valid after that)",
        "{0:.}",
        0
    );
    expect_error!("\"}\" expected", "{0:.2", 0);
    expect_error!("Invalid type specifier for an integer", "{0:.2f}", 42);
    expect_error!("Invalid type specifier for an integer", "{0:.2f}", 42u32);
    expect_error!("Invalid type specifier for an integer", "{0:.2%}", 42);
    expect_error!("Precision is not allowed for integer types", "{0:.2}", 42);
    expect_error!("Precision is not allowed for integer types", "{0:.2}", 42u32);
    expect_error!("Precision is not allowed for integer types", "{0:3.0c}", 'c');
    expect_error!(
        "Precision is not allowed for pointer type",
        "{0:.2}",
        0xcafe as *const ()
    );
    expect_error!(
        "Invalid type specifier for a pointer",
        "{0:.2f}",
        0xcafe as *const ()
    );
}

#[test]
fn dynamic_precision() {
    expect_error!(
        "Expected a closing \"}\" after parsing an argument ID for a dynamic precision",
        "{0:.{",
        0
    );
    expect_error!("\"}\" expected", "{0:.{}", 0);
    expect_error!("Expected a number - an index to an argument", "{0:.{?}}", 0);
    expect_error!("\"}\" expected", "{0:.{1}", 0, 0);
    expect_error!("Argument index out of range", "{0:.{1}}", 0);
    expect_error!(
        "Expected a closing \"}\" after parsing an argument ID for a dynamic precision",
        "{0:.{0:}}",
        0
    );
    expect_error!("Negative precision", "{0:.{1}}", 0, -1);
    expect_error!(
        "Precision value is too big",
        "{0:.{1}}",
        0,
        (i32::MAX as u64 + 1)
    );
    expect_error!("Precision was not an integer", "{0:.{1}}", 0, 0.0);
    expect_error!(
        "Precision is not allowed for integer types",
        "{0:.{1}}",
        42,
        2
    );
}

#[test]
fn benchmark_string() {
    check_write!(
        "0.1250000000:0042:+0.25:str:0x3e8:X:%",
        "{0:0.10f}:{1:04}:{2:+g}:{3}:{4}:{5:c}:%",
        0.125,
        42,
        0.25,
        "str",
        1000 as *const (),
        'X'
    );
}

#[test]
fn write_code_point() {
    check_write!("X", "{:c}", 'X');
    check_write!("Д", "{}", 'Д');
}

#[test]
fn colors_and_emphasis() {
    expect_error!(
        "Invalid emphasis character - valid ones are: B (bold), I (italic), U (underline) and S (strikethrough)",
        "{!L}"
    );
    expect_error!(
        "Invalid emphasis character - valid ones are: B (bold), I (italic), U (underline) and S (strikethrough)",
        "{!BLUE;BL}"
    );
    expect_error!(
        "Invalid emphasis character - valid ones are: B (bold), I (italic), U (underline) and S (strikethrough)",
        "{!BG}"
    );
    expect_error!(
        "Channel value too big - it must be in the range [0-255]",
        "{!256;0;0}"
    );
    expect_error!(
        "Channel value too big - it must be in the range [0-255]",
        "{!0;300;0}"
    );
    expect_error!("\";\" expected followed by the next channel value", "{!0.0}");
    expect_error!("\";\" expected followed by the next channel value", "{!0;0}");
    expect_error!(
        "Expected an integer specifying a channel value (3 channels required)",
        "{!0;0;}"
    );
    expect_error!(
        "\"}\" expected (or \";\" for BG specifier or emphasis)",
        "{!0;0;0.}"
    );
    expect_error!(
        "Invalid color name - it must be a valid identifier (without digits)",
        "{!BL9UE}"
    );

    check_write!("\x1b[38;2;255;020;030m", "{!255;20;30}");
    check_write!("\x1b[38;2;000;000;255m", "{!BLUE}");
    check_write!(
        "\x1b[38;2;000;000;255m\x1b[48;2;255;000;000m",
        "{!BLUE}{!RED;BG}"
    );
    check_write!("\x1b[1m", "{!B}");
    check_write!("\x1b[3m", "{!I}");
    check_write!("\x1b[4m", "{!U}");
    check_write!("\x1b[9m", "{!S}");
    check_write!("\x1b[38;2;000;000;255m\x1b[1m", "{!BLUE;B}");
    check_write!("\x1b[31m", "{!tRED}");
    check_write!("\x1b[46m", "{!tCYAN;BG}");
    check_write!("\x1b[92m", "{!tBRIGHT_GREEN}");
    check_write!("\x1b[105m", "{!tBRIGHT_MAGENTA;BG}");
    check_write!("\x1b[0m", "{!}");
}

#[test]
fn ansi_codes_can_be_disabled() {
    with_context_var(
        |ctx| ctx.fmt_disable_ansi_codes = true,
        || {
            check_write!("", "{!BLUE}");
            check_write!("plain", "{!RED;BG}plain{!}");
        },
    );
}

struct TestPoint {
    x: i32,
    y: i32,
}

impl FmtCustom for TestPoint {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        let debug = f.specs.map(|s| s.hash).unwrap_or(false);
        if debug {
            f.debug_struct("test_point")
                .field("x", &self.x)
                .field("y", &self.y)
                .finish();
        } else {
            f.write_fmt("({}, {})", &fmt_args!(self.x, self.y));
        }
    }
}

core_fmt::impl_fmt_custom!(TestPoint);

struct TestVector {
    x: f32,
    y: f32,
    z: f32,
}

impl FmtCustom for TestVector {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        f.format_tuple("vec3")
            .field(&self.x)
            .field(&self.y)
            .field(&self.z)
            .finish();
    }
}

core_fmt::impl_fmt_custom!(TestVector);

struct Answer;

impl FmtCustom for Answer {
    fn fmt_custom(&self, f: &mut Interp<'_, '_>) {
        core_fmt::render::int::render_signed(f, 42);
    }
}

core_fmt::impl_fmt_custom!(Answer);

#[test]
fn format_custom_types() {
    check_write!("42", "{0}", Answer);
    check_write!("0042", "{:04}", Answer);

    let p = TestPoint { x: 10, y: 20 };
    check_write!("(10, 20)", "{}", p);
    check_write!("test_point { x: 10, y: 20 }", "{:#}", p);

    let v = TestVector {
        x: 1.0,
        y: 2.5,
        z: -3.0,
    };
    check_write!("vec3(1, 2.5, -3)", "{}", v);
}

#[test]
fn format_containers() {
    use core_collections::{Array, Table, Text};

    let empty: Array<i32> = Array::new();
    check_write!("[]", "{}", empty);

    let numbers = Array::from_slice(&[1, 2, 3]);
    check_write!("[1, 2, 3]", "{}", numbers);
    let debug = sprint!("{:#}", numbers);
    assert!(debug.match_beginning("array { count: 3, allocated: "));
    assert!(debug.match_end(", data: [1, 2, 3] }"));

    let mut table: Table<Text, i32> = Table::new();
    check_write!("{}", "{}", table);
    table.set(Text::owned("apple"), 1);
    let shown = sprint!("{}", table);
    assert!(shown.match_beginning("{"));
    assert!(shown.match_end("}"));
    assert!(shown.has_text("apple: 1"));
}

#[test]
fn format_optionals() {
    use core_variant::Optional;

    let empty: Optional<i32> = Optional::Empty;
    let filled: Optional<i32> = Optional::from(42);
    check_write!("nullopt", "{}", empty);
    check_write!("42", "{}", filled);
}

#[test]
fn counting_matches_output() {
    let n = core_fmt::calculate_formatted_size(
        "{0:0.10f}:{1:04}",
        &fmt_args!(0.125, 42),
    );
    let s = sprint!("{0:0.10f}:{1:04}", 0.125, 42);
    assert_eq!(n, s.count());
}
