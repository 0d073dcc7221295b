use structopt::StructOpt;

macro_rules! assert_match {
    ($a:expr => $b:pat) => {
        assert!(match $a {
            $b => true,
            _ => false,
        });
    };
}

#[test]
fn run_with_no_args() {
    let args = [""];
    let res = atscrape::Opt::from_iter_safe(&args);
    assert_match!(res => Err(_));
}

#[test]
fn run_with_contest_url() {
    let args = ["", "https://atcoder.jp/contests/abc100"];
    let res = atscrape::Opt::from_iter_safe(&args);
    assert_match!(res => Ok(_));
}
