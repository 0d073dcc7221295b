use std::fs;
use std::io::Write as _;

use crate::abs_path::AbsPathBuf;
use crate::console::Console;
use crate::macros::regex;
use crate::model::{ContestRef, Problem};
use crate::Result;

static PROBLEMS_DIR_NAME: &str = "problems";
static TESTS_DIR_NAME: &str = "tests";
static TASK_FILE_NAME: &str = "task.md";
static INDEX_FILE_NAME: &str = "index.md";
static SKELETON_FILE_NAME: &str = "template.rs";
static SOLUTION_FILE_NAME: &str = "main.rs";

pub fn contest_dir(base_dir: &AbsPathBuf, contest: &ContestRef) -> AbsPathBuf {
    base_dir
        .join(PROBLEMS_DIR_NAME)
        .join(contest.kind())
        .join(contest.number())
}

/// Saves one problem under the contest directory.
///
/// `task.md` and the test fixtures are always overwritten; the solution
/// skeleton is copied from `<base_dir>/template.rs` only when the target
/// does not exist yet.
pub fn save_problem(
    contest: &ContestRef,
    contest_dir: &AbsPathBuf,
    base_dir: &AbsPathBuf,
    problem: &Problem,
    cnsl: &mut Console,
) -> Result<()> {
    let problem_dir = contest_dir.join(problem.id().to_lowercase());
    let tests_dir = problem_dir.join(TESTS_DIR_NAME);

    let markdown = render_task_markdown(contest, problem);
    problem_dir.join(TASK_FILE_NAME).save_pretty(
        |mut file| Ok(file.write_all(markdown.as_bytes())?),
        true,
        Some(base_dir),
        cnsl,
    )?;

    for (i, test_case) in problem.test_cases().iter().enumerate() {
        tests_dir
            .join(format!("input-{}.txt", i + 1))
            .save(|mut file| Ok(file.write_all(test_case.input().as_bytes())?), true)?;
        tests_dir
            .join(format!("output-{}.txt", i + 1))
            .save(|mut file| Ok(file.write_all(test_case.output().as_bytes())?), true)?;
    }

    copy_skeleton(base_dir, &problem_dir)?;
    Ok(())
}

fn copy_skeleton(base_dir: &AbsPathBuf, problem_dir: &AbsPathBuf) -> Result<()> {
    let skeleton = base_dir.join(SKELETON_FILE_NAME);
    if skeleton.as_ref().is_file() {
        let content = fs::read(skeleton.as_ref())?;
        problem_dir
            .join(SOLUTION_FILE_NAME)
            .save(|mut file| Ok(file.write_all(&content)?), false)?;
    }
    Ok(())
}

/// Writes the contest index linking every given problem.
pub fn save_contest_index(
    contest: &ContestRef,
    contest_dir: &AbsPathBuf,
    base_dir: &AbsPathBuf,
    problems: &[&Problem],
    contest_url: &str,
    cnsl: &mut Console,
) -> Result<()> {
    let mut links = String::new();
    let mut progress = String::new();
    for problem in problems {
        let lower_id = problem.id().to_lowercase();
        links += &format!(
            "- [{} - {}]({}/{})\n",
            problem.id(),
            clean_title(problem.title()),
            lower_id,
            TASK_FILE_NAME
        );
        progress += &format!(
            "| [{}]({}/{}) | - | - | - | - |\n",
            problem.id(),
            lower_id,
            TASK_FILE_NAME
        );
    }

    let markdown = format!(
        "\
# {name}

**Contest URL:** {url}

## Problems

{links}
## Progress

| Problem | Status | Time | Memory | Notes |
|---------|--------|------|--------|-------|
{progress}
## Notes

<!-- Add your notes here -->
",
        name = contest.full_name().to_uppercase(),
        url = contest_url,
        links = links,
        progress = progress,
    );

    contest_dir.join(INDEX_FILE_NAME).save_pretty(
        |mut file| Ok(file.write_all(markdown.as_bytes())?),
        true,
        Some(base_dir),
        cnsl,
    )?;
    Ok(())
}

fn render_task_markdown(contest: &ContestRef, problem: &Problem) -> String {
    let test_command = format!(
        "atscrape test {}{}/{}",
        contest.kind(),
        contest.number(),
        problem.id().to_lowercase()
    );

    let mut test_cases_section = String::new();
    for (i, test_case) in problem.test_cases().iter().enumerate() {
        test_cases_section += &format!(
            "\
### Sample {n}

**Input:**
```
{input}
```

**Output:**
```
{output}
```
",
            n = i + 1,
            input = test_case.input(),
            output = test_case.output(),
        );
        test_cases_section += "\n";
    }

    format!(
        "\
# {id} - {title}


**Time Limit:** {time_limit}


**Memory Limit:** {memory_limit}


**URL:** {url}


---


{statement}


---


## Run Tests

```bash
{test_command}
```


## Test Cases

{test_cases_section}",
        id = problem.id(),
        title = clean_title(problem.title()),
        time_limit = problem.time_limit(),
        memory_limit = problem.memory_limit(),
        url = problem.url(),
        statement = clean_statement(problem.statement()),
        test_command = test_command,
        test_cases_section = test_cases_section,
    )
}

fn clean_title(title: &str) -> String {
    regex!(r"(?i)\s*Editorial\s*")
        .replace_all(title, "")
        .trim()
        .to_owned()
}

/// Final cleanup of an extracted statement before it is written out:
/// drops editorial/copy leftovers and blank lines, then reflows section
/// headings with a single blank line before each.
fn clean_statement(statement: &str) -> String {
    let stripped = regex!(r"(?i)\s*Editorial\s*").replace_all(statement, "");
    let stripped = regex!(r"(?i)\s*Copy\s*").replace_all(&stripped, "");
    let joined = stripped
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && trimmed != "Editorial" && trimmed != "Copy"
        })
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = regex!(r"\n{3,}").replace_all(&joined, "\n\n");
    let spaced = regex!(r"(##\s+\S)").replace_all(&collapsed, "\n$1");
    spaced.trim().to_owned()
}
