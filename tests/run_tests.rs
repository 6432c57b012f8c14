use infix_solve::{Arithmetic, Solver, Trailing};
use std::fmt;

type LineNum = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ok,
    None,
    Err,
}

#[derive(Debug, Clone)]
enum Header {
    Solver,
    Input,
    Expect(Status, LineNum),
}

#[derive(Debug, Clone)]
struct Section {
    header: Header,
    contents: String,
}

#[derive(Debug, Clone)]
struct TestCases {
    sections: Vec<Section>,
}

impl TestCases {
    fn num_tests(&self) -> usize {
        let mut count = 0;
        for section in &self.sections {
            if matches!(section.header, Header::Expect(_, _)) {
                count += 1;
            }
        }
        count
    }
}

/// Split a test file into sections. Each section is a header line followed by
/// one or more content lines starting with `>`. Blank lines and lines starting
/// with `#` are ignored.
fn parse_test_cases(filename: &str, file_contents: &str) -> TestCases {
    let mut sections: Vec<Section> = Vec::new();
    let mut in_contents = false;
    for (line_num, line) in file_contents.lines().enumerate() {
        let line_num = line_num as LineNum;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(content) = line.strip_prefix('>') {
            let content = content.strip_prefix(' ').unwrap_or(content);
            let section = match sections.last_mut() {
                Some(section) => section,
                None => panic!("{}:{}: contents before any header", filename, line_num + 1),
            };
            if in_contents {
                section.contents.push('\n');
            }
            section.contents.push_str(content);
            in_contents = true;
            continue;
        }
        let header = match line.trim() {
            "Solver" => Header::Solver,
            "Input" => Header::Input,
            "Expect Ok" => Header::Expect(Status::Ok, line_num),
            "Expect None" => Header::Expect(Status::None, line_num),
            "Expect Err" => Header::Expect(Status::Err, line_num),
            other => panic!("{}:{}: bad header '{}'", filename, line_num + 1, other),
        };
        sections.push(Section {
            header,
            contents: String::new(),
        });
        in_contents = false;
    }
    TestCases { sections }
}

/// A solver description is a list of words: `strict`, `checked`, or `default`.
fn make_solver(description: &str) -> Solver {
    let mut solver = Solver::new();
    for word in description.split_whitespace() {
        match word {
            "default" => (),
            "strict" => {
                solver.trailing(Trailing::Strict);
            }
            "checked" => {
                solver.arithmetic(Arithmetic::Checked);
            }
            _ => panic!("Bad test case solver description: {} not recognized", word),
        }
    }
    solver
}

fn find_diff(string_1: &str, string_2: &str) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for (x, y) in string_1.chars().zip(string_2.chars()) {
        if x != y {
            break;
        }
        if x == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn run_test_case(
    filename: &str,
    line_num: LineNum,
    solver_description: &str,
    input: &str,
    expected: (Status, String),
) {
    colored::control::set_override(false);

    let solver = make_solver(solver_description);
    let actual = match solver.evaluate("input", input) {
        Ok(Some(value)) => (Status::Ok, format!("{}", value)),
        Ok(None) => (Status::None, String::new()),
        Err(err) => (Status::Err, format!("{}", err)),
    };

    if actual != expected {
        let (diff_line, diff_col) = find_diff(&actual.1, &expected.1);

        println!("Solver");
        println!("> {}", solver_description);
        println!("Input");
        for line in input.lines() {
            println!("> {}", line);
        }
        if input.is_empty() {
            println!(">");
        }
        println!("Expected {}", expected.0);
        for line in expected.1.lines() {
            println!("> {}", line);
        }
        println!("Actual {}", actual.0);
        for line in actual.1.lines() {
            println!("> {}", line);
        }
        panic!(
            "Test case failure at {}, line {} (diff at {}:{}).",
            filename,
            line_num + 1,
            diff_line,
            diff_col
        );
    }
}

fn run_test_cases(filename: &str, test_cases: TestCases) {
    let mut solver = "default".to_owned();
    let mut input = String::new();
    for section in test_cases.sections {
        match section.header {
            Header::Solver => solver = section.contents,
            Header::Input => input = section.contents,
            Header::Expect(status, line_num) => {
                let expected = (status, section.contents);
                run_test_case(filename, line_num, &solver, &input, expected);
            }
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "Ok"),
            Status::None => write!(f, "None"),
            Status::Err => write!(f, "Err"),
        }
    }
}

#[test]
fn run_solver_tests() {
    use std::fs;

    let mut num_files = 0;
    for entry in fs::read_dir("tests/").unwrap() {
        let entry = entry.unwrap();
        let file_type = entry.file_type().unwrap();
        let file_name = entry.file_name().into_string().unwrap();
        if file_type.is_file() && file_name.ends_with(".tests.txt") {
            let file_contents = fs::read_to_string(entry.path()).unwrap();
            let test_cases = parse_test_cases(&file_name, &file_contents);
            let num_tests = test_cases.num_tests();
            run_test_cases(&file_name, test_cases);
            println!("Ran {} successful test cases from {}", num_tests, file_name);
            num_files += 1;
        }
    }
    assert!(num_files > 0, "no .tests.txt files found");
}
