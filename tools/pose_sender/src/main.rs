use std::{
    io::Write,
    net::{SocketAddr, TcpStream},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pose_protocol::{
    encode_batch,
    frames::{ros_pose_commands, ros_to_engine_position, ros_to_engine_quat},
    PoseCommand,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send pose commands to a pose link listener", long_about = None)]
struct Args {
    /// Address of the pose link listener
    #[arg(long, default_value = "127.0.0.1:12345")]
    addr: SocketAddr,

    /// Treat poses as z-up odometry and remap them into the engine camera frame
    #[arg(long)]
    ros_frame: bool,

    /// Resend the message at this rate (Hz); sends once when omitted
    #[arg(long)]
    rate: Option<f64>,

    /// Number of sends when --rate is set (0 keeps sending until interrupted)
    #[arg(long, default_value_t = 0)]
    count: u64,

    #[command(subcommand)]
    command: SendCommand,
}

#[derive(Subcommand, Debug)]
enum SendCommand {
    /// SET_POSITION x,y,z
    #[command(allow_negative_numbers = true)]
    Position { x: f64, y: f64, z: f64 },
    /// SET_QUAT w,x,y,z (scalar first, as on the wire)
    #[command(allow_negative_numbers = true)]
    Quat { w: f64, x: f64, y: f64, z: f64 },
    /// Position and quaternion batched into one message
    #[command(allow_negative_numbers = true)]
    Pose {
        x: f64,
        y: f64,
        z: f64,
        qw: f64,
        qx: f64,
        qy: f64,
        qz: f64,
    },
    /// Send the text verbatim
    Raw { message: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let message = build_message(&args.command, args.ros_frame);

    let Some(rate) = args.rate else {
        send(args.addr, &message)?;
        println!("sent {message:?} to {}", args.addr);
        return Ok(());
    };
    if !(rate.is_finite() && rate > 0.0) {
        anyhow::bail!("--rate must be a positive number of Hz, got {rate}");
    }

    let interval = Duration::from_secs_f64(1.0 / rate);
    let mut sent = 0u64;
    while args.count == 0 || sent < args.count {
        let started = Instant::now();
        send(args.addr, &message).with_context(|| format!("Send {} failed", sent + 1))?;
        sent += 1;
        if let Some(remaining) = interval.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }
    println!("sent {message:?} to {} x{sent}", args.addr);
    Ok(())
}

/// One connection per message; the listener reads once and closes.
fn send(addr: SocketAddr, message: &str) -> Result<()> {
    let mut stream = TcpStream::connect(addr)
        .with_context(|| format!("Unable to connect to pose link at {addr}"))?;
    stream
        .write_all(message.as_bytes())
        .with_context(|| format!("Failed to write message to {addr}"))?;
    Ok(())
}

fn build_message(command: &SendCommand, ros_frame: bool) -> String {
    match *command {
        SendCommand::Position { x, y, z } => encode_batch(&[position(x, y, z, ros_frame)]),
        SendCommand::Quat { w, x, y, z } => encode_batch(&[orientation(w, x, y, z, ros_frame)]),
        SendCommand::Pose {
            x,
            y,
            z,
            qw,
            qx,
            qy,
            qz,
        } if ros_frame => encode_batch(&ros_pose_commands([x, y, z], [qw, qx, qy, qz])),
        SendCommand::Pose {
            x,
            y,
            z,
            qw,
            qx,
            qy,
            qz,
        } => encode_batch(&[
            PoseCommand::SetPosition { x, y, z },
            PoseCommand::SetOrientation { qx, qy, qz, qw },
        ]),
        SendCommand::Raw { ref message } => message.clone(),
    }
}

fn position(x: f64, y: f64, z: f64, ros_frame: bool) -> PoseCommand {
    let (x, y, z) = if ros_frame {
        ros_to_engine_position(x, y, z)
    } else {
        (x, y, z)
    };
    PoseCommand::SetPosition { x, y, z }
}

fn orientation(w: f64, x: f64, y: f64, z: f64, ros_frame: bool) -> PoseCommand {
    let (qw, qx, qy, qz) = if ros_frame {
        ros_to_engine_quat(w, x, y, z)
    } else {
        (w, x, y, z)
    };
    PoseCommand::SetOrientation { qx, qy, qz, qw }
}
