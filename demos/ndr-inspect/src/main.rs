//! NDR stub data inspector
//!
//! Run with:
//!   cargo run --bin ndr-inspect -- list
//!   cargo run --bin ndr-inspect -- sample NspiBind
//!   cargo run --bin ndr-inspect -- decode NspiUnbind response 0000000000000000000000000000000000000000 01000000
//!
//! Set `RUST_LOG=msrpc_ndr=trace` to follow pointer and union decoding.

use std::fmt::Debug;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use msrpc::{iisa, nspi, INTERFACES};
use msrpc_ndr::{NdrContext, NdrString, NdrWString, Operation, ReservedPolicy};

#[derive(Parser)]
#[command(name = "ndr-inspect")]
#[command(about = "Encode sample MSRPC stub data or decode captured stub data")]
struct Args {
    /// Stub data is big-endian
    #[arg(long)]
    big_endian: bool,

    /// Accept non-zero reserved fields with a warning
    #[arg(long)]
    ignore_reserved: bool,

    /// Maximum pointer nesting depth
    #[arg(long, default_value_t = msrpc_ndr::MAX_NDR_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List interfaces and their operations
    List,
    /// Print the stub data of a sample request and response
    Sample {
        /// Operation name, e.g. `NspiBind` or `LineNumber`
        operation: String,
    },
    /// Decode stub data given as hex
    Decode {
        /// Operation name, e.g. `NspiUnbind` or `/nspi/v56/NspiUnbind`
        operation: String,
        /// Which side of the call the stub data belongs to
        direction: Direction,
        /// Hex digits; whitespace-separated chunks are joined
        #[arg(required = true)]
        hex: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Request,
    Response,
}

type BoxError = Box<dyn std::error::Error>;

/// Request value used by `sample`.
trait Sample: Sized {
    fn sample() -> Self;
}

macro_rules! default_samples {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                fn sample() -> Self {
                    Default::default()
                }
            }
        )*
    };
}

default_samples!(
    iisa::OrpcRequest,
    iisa::LineNumberResponse,
    iisa::BstrResponse,
    iisa::SafeArrayResponse,
    nspi::BindRequest,
    nspi::BindResponse,
    nspi::UnbindRequest,
    nspi::UnbindResponse,
    nspi::UpdateStatRequest,
    nspi::UpdateStatResponse,
    nspi::QueryRowsRequest,
    nspi::QueryRowsResponse,
    nspi::SeekEntriesRequest,
    nspi::SeekEntriesResponse,
    nspi::GetMatchesRequest,
    nspi::GetMatchesResponse,
    nspi::ResortRestrictionRequest,
    nspi::ResortRestrictionResponse,
    nspi::DnToMIdResponse,
    nspi::GetPropListRequest,
    nspi::GetPropListResponse,
    nspi::GetPropsRequest,
    nspi::GetPropsResponse,
    nspi::CompareMIdsRequest,
    nspi::CompareMIdsResponse,
    nspi::ModPropsRequest,
    nspi::ModPropsResponse,
    nspi::GetSpecialTableRequest,
    nspi::GetSpecialTableResponse,
    nspi::GetTemplateInfoRequest,
    nspi::GetTemplateInfoResponse,
    nspi::ModLinkAttRequest,
    nspi::ModLinkAttResponse,
    nspi::QueryColumnsRequest,
    nspi::QueryColumnsResponse,
    nspi::GetNamesFromIdsRequest,
    nspi::GetNamesFromIdsResponse,
    nspi::GetIdsFromNamesRequest,
    nspi::GetIdsFromNamesResponse,
    nspi::ResolveNamesResponse,
    nspi::ResolveNamesWResponse,
);

// Name arrays must hold at least one name.
impl Sample for nspi::DnToMIdRequest {
    fn sample() -> Self {
        Self {
            names: ["/o=Example/cn=Recipients/cn=user"]
                .into_iter()
                .map(NdrString::new)
                .collect(),
            ..Default::default()
        }
    }
}

impl Sample for nspi::ResolveNamesRequest {
    fn sample() -> Self {
        Self {
            names: ["user"].into_iter().map(NdrString::new).collect(),
            ..Default::default()
        }
    }
}

impl Sample for nspi::ResolveNamesWRequest {
    fn sample() -> Self {
        Self {
            names: ["user"].into_iter().map(NdrWString::new).collect(),
            ..Default::default()
        }
    }
}

fn sample<Op>(ctx: &NdrContext) -> Result<(), BoxError>
where
    Op: Operation,
    Op::Request: Sample,
    Op::Response: Sample,
{
    let request = Op::marshal_request(ctx, &Op::Request::sample())?;
    let response = Op::marshal_response(ctx, &Op::Response::sample())?;
    println!("{} (opnum {})", Op::NAME, Op::OPNUM);
    println!("  request:  {}", hex::encode(&request));
    println!("  response: {}", hex::encode(&response));
    Ok(())
}

fn decode<Op>(ctx: &NdrContext, direction: Direction, data: Vec<u8>) -> Result<(), BoxError>
where
    Op: Operation,
    Op::Request: Debug,
    Op::Response: Debug,
{
    info!(operation = Op::NAME, len = data.len(), "decoding stub data");
    match direction {
        Direction::Request => println!("{:#?}", Op::unmarshal_request(ctx, data)?),
        Direction::Response => println!("{:#?}", Op::unmarshal_response(ctx, data)?),
    }
    Ok(())
}

/// Resolve a method name (`NspiBind`, `/nspi/v56/NspiBind`) and run `$f`
/// with the matching operation type.
macro_rules! with_operation {
    ($name:expr, $f:ident $args:tt) => {{
        let name: &str = $name;
        let method = name.rsplit('/').next().unwrap_or(name);
        with_operation!(@match method, $f $args;
            iisa::LineNumber, iisa::FileName, iisa::ConfigPath, iisa::ErrorLine,
            iisa::PreErrorLine, iisa::PostErrorLine, iisa::ErrorString,
            iisa::InvalidValue, iisa::ValidationFailureReason, iisa::ValidationFailureParameters,
            nspi::Bind, nspi::Unbind, nspi::UpdateStat, nspi::QueryRows,
            nspi::SeekEntries, nspi::GetMatches, nspi::ResortRestriction,
            nspi::DnToMId, nspi::GetPropList, nspi::GetProps, nspi::CompareMIds,
            nspi::ModProps, nspi::GetSpecialTable, nspi::GetTemplateInfo, nspi::ModLinkAtt,
            nspi::QueryColumns, nspi::GetNamesFromIds, nspi::GetIdsFromNames,
            nspi::ResolveNames, nspi::ResolveNamesW)
    }};
    (@match $method:expr, $f:ident $args:tt; $($op:ty),*) => {{
        let mut result: Option<Result<(), BoxError>> = None;
        $(
            if result.is_none() && <$op as Operation>::NAME.rsplit('/').next() == Some($method) {
                result = Some($f::<$op> $args);
            }
        )*
        result.unwrap_or_else(|| Err(format!("unknown operation: {}", $method).into()))
    }};
}

fn list() {
    for interface in INTERFACES {
        println!(
            "{} {} v{}.{}",
            interface.name, interface.uuid, interface.version.0, interface.version.1
        );
        for (opnum, name) in interface.operations {
            println!("  {:>3}  {}", opnum, name);
        }
    }
}

/// Join whitespace-separated hex chunks and decode them.
fn decode_hex(chunks: &[String]) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(chunks.concat())
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let ctx = NdrContext::new()
        .with_byte_order(!args.big_endian)
        .with_max_depth(args.max_depth)
        .with_reserved_policy(if args.ignore_reserved {
            ReservedPolicy::Ignore
        } else {
            ReservedPolicy::Reject
        });

    match args.command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Sample { operation } => with_operation!(&operation, sample(&ctx)),
        Command::Decode {
            operation,
            direction,
            hex,
        } => {
            let data = decode_hex(&hex)?;
            with_operation!(&operation, decode(&ctx, direction, data.clone()))
        }
    }
}
